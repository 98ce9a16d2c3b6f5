use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(
        "invalid maze configuration {width}x{height}: width and height must be odd and at least 5"
    )]
    InvalidConfiguration { width: i32, height: i32 },

    #[error("no free cell found after {attempts} attempts: maze too small or fully walled")]
    ExhaustedFreeCellSearch { attempts: usize },
}
