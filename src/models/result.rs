use serde::{Deserialize, Serialize};
use std::fmt;

/// 等级档位，从高到低
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    /// 档位排名，F 为 0，A+ 为 6
    pub fn rank(self) -> u8 {
        match self {
            Grade::F => 0,
            Grade::D => 1,
            Grade::C => 2,
            Grade::B => 3,
            Grade::BPlus => 4,
            Grade::A => 5,
            Grade::APlus => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 总评结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    Pass,
    Fail,
}

impl ResultStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultStatus::Pass => "PASS",
            ResultStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 单科成绩
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectResult {
    /// 科目名（即数据集中的列名）
    pub name: String,
    pub marks: f64,
    pub max_marks: f64,
    pub grade: Grade,
}

/// 一名学生的计算结果，每次渲染时重新计算，不缓存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedResult {
    pub total_marks: f64,
    pub max_total_marks: f64,
    /// 保留两位小数
    pub percentage: f64,
    pub grade: Grade,
    pub status: ResultStatus,
    pub subjects: Vec<SubjectResult>,
}
