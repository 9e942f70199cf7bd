// handlers/protected/mod.rs - handlers behind jwt_auth_middleware
//
// Every handler here receives the caller as Extension<AuthUser> and passes
// its user_id to the service; nothing is read from the request body as identity.

pub mod todos;
