pub(crate) mod openid;
pub(crate) mod session;
