use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Zero address")]
    ZeroAddress,
    #[msg("Purchase value must be greater than zero")]
    ZeroValueInput,
    #[msg("Batch amount must be greater than zero")]
    ZeroAmount,
    #[msg("Batch arrays should have same length")]
    ArrayLengthMismatch,

    #[msg("Vault not seeded")]
    NotSeeded,
    #[msg("Vault already seeded")]
    AlreadySeeded,
    #[msg("Collaborator does not match seeded config")]
    CollaboratorMismatch,
    #[msg("Purchases are disabled")]
    PurchasesDisabled,
    #[msg("Manual batch insertion is no longer allowed")]
    BatchInsertionClosed,
    #[msg("Locked batch not found")]
    BatchNotFound,
    #[msg("Rescue config not captured")]
    ConfigNotCaptured,
    #[msg("Invalid rescue phase")]
    InvalidRescuePhase,

    #[msg("Nothing to claim")]
    NothingToClaim,
    #[msg("LP still locked")]
    StillLocked,
    #[msg("Oracle not yet updated")]
    OracleNotYetUpdated,
    #[msg("Oracle update period not elapsed")]
    OracleUpdatePeriodNotElapsed,

    #[msg("Insufficient tokens in vault")]
    InsufficientVaultTokenBalance,
    #[msg("Insufficient pool units for transfer")]
    InsufficientPoolBalance,
    #[msg("Reserves cannot be zero")]
    ReservesUnavailable,

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Share must be at most 1000 per mille")]
    InvalidShare,
}

/// Coarse cause of a failure, for callers that branch on retry-ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    State,
    Timing,
    Resource,
    Access,
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::Unauthorized => ErrorKind::Access,
            VaultError::ZeroAddress
            | VaultError::ZeroValueInput
            | VaultError::ZeroAmount
            | VaultError::ArrayLengthMismatch
            | VaultError::BatchNotFound
            | VaultError::InvalidShare => ErrorKind::Input,
            VaultError::NotSeeded
            | VaultError::AlreadySeeded
            | VaultError::CollaboratorMismatch
            | VaultError::PurchasesDisabled
            | VaultError::BatchInsertionClosed
            | VaultError::ConfigNotCaptured
            | VaultError::InvalidRescuePhase
            | VaultError::NothingToClaim
            | VaultError::MathOverflow => ErrorKind::State,
            VaultError::StillLocked
            | VaultError::OracleNotYetUpdated
            | VaultError::OracleUpdatePeriodNotElapsed => ErrorKind::Timing,
            VaultError::InsufficientVaultTokenBalance
            | VaultError::InsufficientPoolBalance
            | VaultError::ReservesUnavailable => ErrorKind::Resource,
        }
    }

    /// True when re-submitting the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timing)
    }
}

/// Numeric code carried by an anchor error, if it is one.
pub fn error_code_of(err: &anchor_lang::error::Error) -> Option<u32> {
    match err {
        anchor_lang::error::Error::AnchorError(e) => Some(e.error_code_number),
        anchor_lang::error::Error::ProgramError(_) => None,
    }
}
