pub mod report;

// 重新导出核心类型
pub use report::{
    AnalysisReport, BurstAnalysis, BurstWindow, ErrorCluster, SignatureSummary, WindowSummary,
    INSUFFICIENT_DATA,
};
