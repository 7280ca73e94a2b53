//! Statistical utilities for the noughts workspace.
//!
//! This crate provides:
//!
//! - **Descriptive statistics**: mean, median, variance and standard deviation of a sample,
//!   used to summarize cross-validation fold scores
//! - **Classification report**: confusion matrix plus per-class precision, recall, F1 and
//!   support, used to evaluate a trained model on held-out data
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`classification`]: Confusion matrix and per-class metrics for label predictions
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use noughts_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Evaluating predictions
//!
//! ```
//! use noughts_stats::classification::ClassificationReport;
//!
//! let actual = ["x", "o", "x", "nobody"];
//! let predicted = ["x", "x", "x", "nobody"];
//! let report = ClassificationReport::new(&actual, &predicted).unwrap();
//! assert_eq!(report.accuracy, 0.75);
//! assert_eq!(report.class("x").unwrap().recall, 1.0);
//! ```

pub mod classification;
pub mod descriptive;
