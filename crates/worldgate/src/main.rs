//! Binary entry point for the worldgate relay server.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lib_worldgate::init().await
}
