use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error(transparent)]
    XrplClient(#[from] xrpl_client::XrplClientError),

    #[error("channel closed, no consumer left to receive scanned transactions")]
    ChannelClosed,
}
