pub mod login_user;
pub mod logout_user;
pub mod refresh_access_token;
pub mod register_user;

pub use login_user::LoginUserUseCase;
pub use logout_user::LogoutUserUseCase;
pub use refresh_access_token::RefreshAccessTokenUseCase;
pub use register_user::RegisterUserUseCase;
