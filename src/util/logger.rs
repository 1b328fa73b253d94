use std::fmt::{Display, Formatter};

use crate::token::Token;
use crate::util::Code;

use super::Log;
impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl<T> Log<T> {
    /// Function which return order of the log.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<TL: Display> Log<TL> {
    /// Logs the outcome of a single scan step: the matched token on
    /// success, or the position of the failed attempt on `None`.
    pub fn log_scan_result(&self, index: usize, result: Option<Token>, code: &Code) -> Option<Token> {
        #[cfg(debug_assertions)]
        match &result {
            Some(token) => {
                if self.order() >= Log::Success(()).order() {
                    println!(
                        "[{}; ScanSuccess]: token: {:?} at {}",
                        self,
                        token.kind(),
                        code.obtain_position(token.offset())
                    )
                }
            }
            None => {
                if self.order() >= Log::Result(()).order() {
                    println!(
                        "[{}; ScanFailure]: at {}",
                        self,
                        code.obtain_position(index)
                    )
                }
            }
        }

        result
    }
}
