mod handler;
pub mod model;

pub use handler::{
    INVALID_USER_ID, SELF_ACTION, login, ping, refresh_token, register, set_admin, set_banned,
    set_deleted,
};
