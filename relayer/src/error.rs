use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayerError {
    #[error(transparent)]
    Contract(#[from] contract_client::ContractClientError),

    #[error(transparent)]
    Xrpl(#[from] xrpl_client::XrplClientError),

    #[error(transparent)]
    Scanner(#[from] xrpl_scanner::ScannerError),

    #[error(transparent)]
    Amount(#[from] xrpl_amount::AmountCodecError),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("unrecognized memo, skipping without voting: {0}")]
    UnrecognizedMemo(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, RelayerError>;
