/// Liveness line served at the root path.
pub async fn health() -> &'static str {
    "API is working!"
}
