//! 等级划分
//!
//! 百分比 -> 等级档位，每档包含下边界：
//! `[90,∞) A+ | [80,90) A | [70,80) B+ | [60,70) B | [50,60) C | [40,50) D | 其余 F`
//!
//! 不做截断：超过 100 仍是 A+，低于 0 仍是 F，NaN 归为 F。

use crate::models::Grade;

const BANDS: [(f64, Grade); 6] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::C),
    (40.0, Grade::D),
];

pub fn classify(percentage: f64) -> Grade {
    BANDS
        .iter()
        .find(|(lower, _)| percentage >= *lower)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}
