// ============================================================================
// HTTP Front Door
// ============================================================================
//
// Endpoint routing and outcome-to-status mapping only; everything of
// substance happens in the ingest pipeline.
// ============================================================================

mod routes;
mod server;

pub use server::run;
