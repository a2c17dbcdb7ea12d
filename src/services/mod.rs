//! 服务模块

pub mod clock;
pub mod date_resolver;
pub mod ease;
pub mod normalizer;
pub mod predictor;
pub mod scheduler;
pub mod study;

pub use clock::{Clock, FixedClock, SystemClock};
pub use normalizer::{normalize, normalize_item};
pub use predictor::{IntervalPredictor, fallback_interval};
pub use scheduler::{Scheduler, priority};
pub use study::{StudyService, create_study_service};
