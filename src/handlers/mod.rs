// handlers/mod.rs - handler tiers
//
// Public (no auth) → Protected (Bearer JWT, caller identity injected as AuthUser)

pub mod public;
pub mod protected;
