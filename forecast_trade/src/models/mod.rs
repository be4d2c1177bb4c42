//! Regression models for multi-horizon forecasting
//!
//! - [`scaler::StandardScaler`] standardizes feature columns
//! - [`decision_tree::DecisionTreeRegressor`] is a CART regression tree
//! - [`random_forest::RandomForestRegressor`] bags seeded trees
//! - [`horizon::HorizonModelTrainer`] fits one scaler and forest per horizon

pub mod decision_tree;
pub mod horizon;
pub mod random_forest;
pub mod scaler;

pub use decision_tree::{DecisionTreeRegressor, TreeConfig};
pub use horizon::{HorizonModelTrainer, TrainedHorizonModel, TrainingSet};
pub use random_forest::{ForestConfig, RandomForestRegressor};
pub use scaler::StandardScaler;
