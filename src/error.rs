use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    ResourceCreation,
    DeviceLost,
    NotImplemented,
    StateStackUnderflow,
    NotInvertible,
    UsageFault,
    Render,
}

#[derive(Clone, PartialEq, Debug, Error)]
pub enum Error {
    #[error("failed to create {what}: {detail}")]
    ResourceCreation { what: &'static str, detail: String },
    #[error("the render target must be recreated")]
    DeviceLost,
    #[error("{0} is not implemented by this backend")]
    NotImplemented(&'static str),
    #[error("pop_state called without a matching push_state")]
    StateStackUnderflow,
    #[error("the matrix is not invertible")]
    NotInvertible,
    #[error("usage fault: {0}")]
    UsageFault(&'static str),
    #[error("rendering failed: {0}")]
    Render(String),
}

impl Error {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceCreation { .. } => ErrorKind::ResourceCreation,
            Self::DeviceLost => ErrorKind::DeviceLost,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::StateStackUnderflow => ErrorKind::StateStackUnderflow,
            Self::NotInvertible => ErrorKind::NotInvertible,
            Self::UsageFault(_) => ErrorKind::UsageFault,
            Self::Render(_) => ErrorKind::Render,
        }
    }

    #[inline]
    pub(crate) fn creation(what: &'static str, detail: impl ToString) -> Self {
        Self::ResourceCreation {
            what,
            detail: detail.to_string(),
        }
    }
}

impl PartialEq<ErrorKind> for Error {
    fn eq(&self, rhs: &ErrorKind) -> bool {
        self.kind() == *rhs
    }
}

impl PartialEq<Error> for ErrorKind {
    fn eq(&self, rhs: &Error) -> bool {
        rhs == self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_test() {
        assert!(Error::DeviceLost == ErrorKind::DeviceLost);
        assert!(ErrorKind::StateStackUnderflow == Error::StateStackUnderflow);
        assert!(Error::NotImplemented("layers") != ErrorKind::UsageFault);
    }

    #[test]
    fn creation_message() {
        let e = Error::creation("solid color brush", "out of memory");
        assert_eq!(e.kind(), ErrorKind::ResourceCreation);
        assert_eq!(
            e.to_string(),
            "failed to create solid color brush: out of memory"
        );
    }
}
