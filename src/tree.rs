use std::fmt;
use std::str::FromStr;

use crate::error::EbdError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewickTree {
    text: String,
    leaves: Vec<String>,
}

impl NewickTree {
    pub fn to_newick(&self) -> &str {
        &self.text
    }

    pub fn leaf_labels(&self) -> &[String] {
        &self.leaves
    }
}

impl fmt::Display for NewickTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl FromStr for NewickTree {
    type Err = EbdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EbdError::InvalidNewick("empty tree".to_string()));
        }
        if !trimmed.ends_with(';') {
            return Err(EbdError::InvalidNewick(
                "missing terminating semicolon".to_string(),
            ));
        }

        let body = &trimmed[..trimmed.len() - 1];
        let mut depth: u32 = 0;
        let mut leaves = Vec::new();
        let mut label = String::new();
        let mut after_close = false;
        let mut in_length = false;

        let mut flush = |label: &mut String, after_close: bool, in_length: bool| {
            if !label.is_empty() && !after_close && !in_length {
                leaves.push(std::mem::take(label));
            } else {
                label.clear();
            }
        };

        for ch in body.chars() {
            match ch {
                '(' => {
                    if !label.is_empty() {
                        return Err(EbdError::InvalidNewick(format!(
                            "unexpected '(' after {label:?}"
                        )));
                    }
                    depth += 1;
                    after_close = false;
                    in_length = false;
                }
                ')' => {
                    if depth == 0 {
                        return Err(EbdError::InvalidNewick(
                            "unbalanced parentheses".to_string(),
                        ));
                    }
                    flush(&mut label, after_close, in_length);
                    depth -= 1;
                    after_close = true;
                    in_length = false;
                }
                ',' => {
                    flush(&mut label, after_close, in_length);
                    after_close = false;
                    in_length = false;
                }
                ':' => {
                    flush(&mut label, after_close, in_length);
                    in_length = true;
                }
                _ if ch.is_whitespace() => {}
                _ => {
                    if !in_length {
                        label.push(ch);
                    }
                }
            }
        }
        flush(&mut label, after_close, in_length);

        if depth != 0 {
            return Err(EbdError::InvalidNewick(
                "unbalanced parentheses".to_string(),
            ));
        }
        if leaves.is_empty() {
            return Err(EbdError::InvalidNewick("tree has no leaves".to_string()));
        }

        Ok(Self {
            text: trimmed.to_string(),
            leaves,
        })
    }
}
