//! 账户服务：注册、登录、资料读取与更新

use crate::{
    auth::{ensure_owner, Claims, PasswordHasher, PasswordPolicy, TokenCodec, TokenStatus},
    config::SecurityConfig,
    error::AppError,
    models::{LoginRequest, LoginResponse, PublicProfile, RegisterRequest, UpdateProfileRequest},
    repository::{AccountUpdate, CredentialStore, StoreError},
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// 时间来源，测试中可替换
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenCodec>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    token_ttl: Duration,
    clock: Clock,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenCodec>,
        hasher: PasswordHasher,
        config: &SecurityConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            policy: PasswordPolicy::from_config(config),
            token_ttl: Duration::seconds(config.token_ttl_secs as i64),
            clock: Arc::new(Utc::now),
        }
    }

    /// 替换时间来源
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// 注册新账户
    pub async fn register(&self, req: RegisterRequest) -> Result<PublicProfile, AppError> {
        let (Some(display_name), Some(username), Some(password)) =
            (req.display_name, req.username, req.password)
        else {
            return Err(AppError::MissingFields);
        };

        self.policy.validate_username(&username)?;
        self.policy.validate_password(&password)?;

        // 仅为提前返回；唯一性以存储层约束为准
        if self.store.username_exists(&username).await? {
            metrics::counter!("auth_registrations_total", "outcome" => "conflict").increment(1);
            return Err(AppError::Conflict);
        }

        let password_hash = self.hasher.hash(&password)?;

        let account = match self
            .store
            .create_account(&display_name, &username, &password_hash)
            .await
        {
            Ok(account) => account,
            Err(e) => {
                let outcome = match e {
                    StoreError::Conflict => "conflict",
                    StoreError::Database(_) => "error",
                };
                metrics::counter!("auth_registrations_total", "outcome" => outcome).increment(1);
                return Err(e.into());
            }
        };

        metrics::counter!("auth_registrations_total", "outcome" => "created").increment(1);
        tracing::info!(account_id = %account.id, username = %account.username, "Account registered");

        Ok(account.into())
    }

    /// 用户登录，成功时返回令牌
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        // 未知用户与密码错误返回同一错误，避免用户名枚举
        let Some(account) = self.store.find_by_username(&req.username).await? else {
            self.hasher.verify_dummy(&req.password);
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            tracing::debug!("Login rejected");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(&req.password, &account.password_hash) {
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            tracing::debug!("Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let now = self.now();
        if account.active_token(now).is_some() {
            tracing::debug!(account_id = %account.id, "Replacing active token");
        }

        let expires_at = now + self.token_ttl;
        let claims = Claims {
            sub: account.id,
            name: account.display_name.clone(),
            username: account.username.clone(),
            exp: expires_at.timestamp(),
        };
        let token = self.tokens.issue(&claims)?;

        // 令牌以签发为准，存储失败只记录日志
        if let Err(e) = self
            .store
            .save_token(&account.username, &token, expires_at)
            .await
        {
            tracing::warn!(
                account_id = %account.id,
                error = %e,
                "Failed to persist issued token"
            );
        }

        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
        tracing::info!(account_id = %account.id, "Login succeeded");

        Ok(LoginResponse { token })
    }

    /// 校验令牌：无效 -> Unauthorized，过期 -> TokenExpired
    pub fn authenticate(&self, token: &str) -> Result<Claims, AppError> {
        match self.tokens.verify_at(token, self.now()) {
            TokenStatus::Valid(claims) => Ok(claims),
            TokenStatus::Invalid => Err(AppError::Unauthorized),
            TokenStatus::Expired => Err(AppError::TokenExpired),
        }
    }

    /// 读取资料：任何有效令牌都可读取任意账户的公开信息
    pub async fn get_profile(&self, username: &str, token: &str) -> Result<PublicProfile, AppError> {
        self.authenticate(token)?;

        self.store
            .find_public_info_by_username(username)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// 更新资料：仅限账户本人
    pub async fn update_profile(
        &self,
        username: &str,
        token: &str,
        req: UpdateProfileRequest,
    ) -> Result<(), AppError> {
        let claims = self.authenticate(token)?;
        ensure_owner(&claims, username)?;

        let (Some(display_name), Some(password)) = (req.display_name, req.password) else {
            return Err(AppError::MissingFields);
        };

        let account = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(AppError::NotFound)?;

        if account.display_name == display_name
            && self.hasher.verify(&password, &account.password_hash)
        {
            return Err(AppError::NoChange("submitted data matches current data"));
        }

        self.policy.validate_password(&password)?;

        let password_hash = self.hasher.hash(&password)?;

        match self
            .store
            .update_account(username, &display_name, &password_hash)
            .await?
        {
            AccountUpdate::Updated => {
                tracing::info!(account_id = %account.id, "Profile updated");
                Ok(())
            }
            AccountUpdate::Unchanged => Err(AppError::NoChange("nothing was updated")),
            AccountUpdate::NotFound => Err(AppError::NotFound),
        }
    }
}
