//! 难度系数更新

use crate::error::{AppError, Result};
use crate::services::normalizer::clamp_ease_factor;

/// 表现不低于该值时提高难度系数
const GROW_THRESHOLD: f64 = 0.8;
/// 表现低于该值时降低难度系数
const KEEP_THRESHOLD: f64 = 0.6;

/// 根据本次复习表现（0..1）计算新的难度系数
pub fn update_ease_factor(current_ease: f64, performance: f64) -> Result<f64> {
    if !current_ease.is_finite() || !performance.is_finite() {
        return Err(AppError::Validation(format!(
            "current_ease and performance must be finite numbers, got {} and {}",
            current_ease, performance
        )));
    }

    let updated = if performance >= GROW_THRESHOLD {
        current_ease * 1.1
    } else if performance >= KEEP_THRESHOLD {
        current_ease
    } else {
        current_ease * 0.8
    };

    Ok(clamp_ease_factor(updated))
}
