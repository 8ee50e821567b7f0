mod schema;

pub use schema::{
    AnalysisConfig, CLIENT_ID_ENV, CLIENT_SECRET_ENV, Config, InteractConfig, config_dir,
};
