// A poisoned lock means the process is in an unrecoverable state and must not continue (we panic).
pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - program validity cannot be guaranteed";
