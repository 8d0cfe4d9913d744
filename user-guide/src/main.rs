use user_guide::application::{self, ApplicationError};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    application::create_default()?.run().await
}
