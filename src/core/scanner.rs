//! Line-oriented extraction of test function names from a C test source.
//!
//! This is a heuristic, not a tokenizer: any line containing `//` is skipped
//! outright, and block comments are tracked with a single flag that `/*` sets
//! and `*/` clears, both checked on the same line before the marker test.

use crate::domain::ports::Storage;
use crate::utils::error::{Result, UtgenError};
use std::path::Path;

const LINE_COMMENT: &str = "//";
const BLOCK_COMMENT_OPEN: &str = "/*";
const BLOCK_COMMENT_CLOSE: &str = "*/";

/// 函式名稱所在的 token 位置 (`UNIT_TEST bool name() {`)
const NAME_TOKEN_INDEX: usize = 2;
/// 去掉名稱後面的 `()`
const NAME_SUFFIX_LEN: usize = 2;

#[derive(Debug, Clone)]
pub struct DeclarationScanner {
    marker: String,
}

impl DeclarationScanner {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn scan_file<S: Storage + ?Sized>(&self, storage: &S, path: &Path) -> Result<Vec<String>> {
        let content = storage.read_to_string(path)?;
        self.scan_str(&path.display().to_string(), &content)
    }

    /// 依原始碼順序回傳測試函式名稱，重複的名稱不會被去除
    pub fn scan_str(&self, file_name: &str, content: &str) -> Result<Vec<String>> {
        let mut tests = Vec::new();
        let mut in_block_comment = false;

        for (index, line) in content.lines().enumerate() {
            if line.contains(LINE_COMMENT) {
                continue;
            }

            if line.contains(BLOCK_COMMENT_OPEN) {
                in_block_comment = true;
            }

            if line.contains(BLOCK_COMMENT_CLOSE) {
                in_block_comment = false;
            }

            if line.contains(self.marker.as_str()) && !in_block_comment {
                tests.push(self.extract_name(file_name, index + 1, line)?);
            }
        }

        tracing::debug!("Found {} test declarations in {}", tests.len(), file_name);
        Ok(tests)
    }

    fn extract_name(&self, file_name: &str, line_number: usize, line: &str) -> Result<String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let Some(token) = tokens.get(NAME_TOKEN_INDEX) else {
            return Err(UtgenError::MalformedInput {
                file: file_name.to_string(),
                line: line_number,
                reason: format!(
                    "expected at least {} tokens after trimming, found {}",
                    NAME_TOKEN_INDEX + 1,
                    tokens.len()
                ),
            });
        };

        if tokens[0] != self.marker {
            tracing::warn!(
                "{}:{}: '{}' is not at the start of the declaration",
                file_name,
                line_number,
                self.marker
            );
        }

        let mut chars = token.chars();
        for _ in 0..NAME_SUFFIX_LEN {
            chars.next_back();
        }
        let name = chars.as_str();

        if name.is_empty() {
            tracing::warn!("{}:{}: extracted an empty test name", file_name, line_number);
        }

        Ok(name.to_string())
    }
}

impl Default for DeclarationScanner {
    fn default() -> Self {
        Self::new("UNIT_TEST")
    }
}
