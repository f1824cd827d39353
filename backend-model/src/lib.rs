// Backend Model Layer
// Preprocessing, oversampling, classifier, evaluation and the artifact format

pub mod artifact;
pub mod encoder;
pub mod error;
pub mod evaluation;
pub mod logistic;
pub mod pipeline;
pub mod preprocessor;
pub mod scaler;
pub mod schema;
pub mod scorer;
pub mod smote;
pub mod split;
pub mod training;

pub use artifact::ModelArtifact;
pub use error::ModelError;
pub use evaluation::EvaluationReport;
pub use pipeline::FraudPipeline;
pub use schema::FeatureSchema;
pub use scorer::PipelineScorer;
pub use training::{train_pipeline, TrainingOptions, TrainingOutcome};
