use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 一名学生的原始数据行（列名 -> 字符串值）
///
/// 列名由数据集决定，值一律是字符串，数值转换在下游完成。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRecord {
    values: HashMap<String, String>,
}

impl StudentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取某一列的原始值
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// 读取某一列并去掉首尾空白，空值视为不存在
    pub fn display_value(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StudentRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
