//! 输入源：把任意 `BufRead` 变成惰性、单遍、不可重启的日志行序列
//!
//! 内存占用与单行长度成正比，与文件大小无关。

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::utils::encoding::{decode_log_line, trim_line_ending};

/// 逐行读取并解码的迭代器
pub struct LogLines<R> {
    reader: R,
    buffer: Vec<u8>,
    line_number: u64,
    lossy_lines: u64,
}

impl<R: BufRead> LogLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(512),
            line_number: 0,
            lossy_lines: 0,
        }
    }

    /// 已读取的行数
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// 经过有损解码的行数
    pub fn lossy_lines(&self) -> u64 {
        self.lossy_lines
    }
}

impl<R: BufRead> Iterator for LogLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                let (text, encoding) = decode_log_line(trim_line_ending(&self.buffer));
                if encoding.is_lossy() {
                    self.lossy_lines += 1;
                    warn!(
                        line = self.line_number,
                        encoding = encoding.as_str(),
                        "Line is not valid UTF-8, decoded with fallback"
                    );
                }
                Some(Ok(text.into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// 打开日志文件；打开失败即整次运行失败
pub fn open_log_file(path: &Path) -> Result<LogLines<BufReader<File>>> {
    let file = File::open(path).map_err(|e| AppError::input_unavailable(path, e))?;
    Ok(LogLines::new(BufReader::new(file)))
}
