use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{Account, LoginRequest, RegisterRequest, RegistrationResult, User};
use crate::services::password_hasher::PasswordHasher;
use crate::store::{AccountRepository, DuplicateField, NewAccount, StoreError};

/// Opens a new account. Business rejections come back as a
/// [`RegistrationResult`]; only infrastructure failures are `Err`.
pub async fn register(
    repo: &dyn AccountRepository,
    hasher: &dyn PasswordHasher,
    request: RegisterRequest,
) -> Result<RegistrationResult, AppError> {
    if request.password != request.confirm_password {
        return Ok(RegistrationResult::PasswordDoNotMatch);
    }

    let email = request.email.trim();
    let username = request.username.trim();
    if email.is_empty() || username.is_empty() || request.password.is_empty() {
        return Ok(RegistrationResult::UsernameOrEmailOrPasswordIsEmpty);
    }

    if repo.find_by_email(email).await?.is_some() {
        return Ok(RegistrationResult::EmailAlreadyExists);
    }
    if repo.find_by_username(username).await?.is_some() {
        return Ok(RegistrationResult::UsernameAlreadyExists);
    }

    if !(request.starting_balance.is_finite() && request.starting_balance > 0.0) {
        return Ok(RegistrationResult::StartingBalanceMustBePositive);
    }

    let password_hash = hasher.hash(&request.password)?;
    let machine_name = request
        .machine_name
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    let holder = User::new(username.to_string(), email.to_string(), password_hash, machine_name);

    let new_account = NewAccount {
        holder,
        starting_balance: request.starting_balance,
    };
    match repo.create(new_account).await {
        Ok(account) => {
            info!("Registered account {} for {}", account.id, username);
            Ok(RegistrationResult::Success)
        }
        Err(StoreError::Duplicate(field)) => {
            warn!("Registration for {} lost a uniqueness race on {}", username, field);
            Ok(match field {
                DuplicateField::Email => RegistrationResult::EmailAlreadyExists,
                DuplicateField::Username => RegistrationResult::UsernameAlreadyExists,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks credentials and returns the account to open a session for.
///
/// Fails with:
/// * `UserNotFound` when no account has `username`
/// * `InvalidPassword` when the hash does not verify
/// * `DifferentPcName` when the account is bound to another machine
pub async fn login(
    repo: &dyn AccountRepository,
    hasher: &dyn PasswordHasher,
    request: &LoginRequest,
) -> Result<Account, AppError> {
    let username = request.username.trim();
    let account = repo
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::UserNotFound {
            username: username.to_string(),
        })?;

    if !hasher.verify(&account.account_holder.password_hash, &request.password) {
        return Err(AppError::InvalidPassword {
            username: username.to_string(),
        });
    }

    // An account registered with a machine name only logs in from that machine.
    if let Some(pc_name) = &account.account_holder.pc_name {
        let machine_name = request.machine_name.as_deref().map(str::trim).unwrap_or_default();
        if machine_name != pc_name {
            return Err(AppError::DifferentPcName {
                username: username.to_string(),
                machine_name: machine_name.to_string(),
                pc_name: pc_name.clone(),
            });
        }
    }

    Ok(account)
}
