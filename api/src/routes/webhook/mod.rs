pub mod github_webhook_response;
pub mod github_webhook_route;
