// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here is wrapped with `requires_auth` and a permission guard
// when it is routed; the handlers themselves can rely on `AuthUser` being
// present in the request extensions.
//
// | Handler           | Permission         |
// |-------------------|--------------------|
// | drinks::detail    | get:drinks-detail  |
// | drinks::create    | post:drinks        |
// | drinks::update    | patch:drinks       |
// | drinks::delete    | delete:drinks      |

pub mod drinks;
pub mod utils;
