/// Sports-data collaborator: fixture schedule, details, injuries, standings.
pub mod fixture_source;
/// Community-platform collaborator: posts and comments.
pub mod forum;
/// Normalized data models shared by the controller and the renderer.
pub mod models;
/// Backend-agnostic collaborator error.
pub mod upstream;
