/// Currencies and the immutable [`money::Money`] value.
pub mod money;

/// Accounts and the transactions recorded in their history.
/// Balance is modified using events, which are created by handling commands
pub mod account;

/// Currency conversion interface, plus a fixed rate table implementation.
pub mod converter;

/// Per-currency ceiling on a single transfer.
pub mod limits;

/// Account store interface, plus "in memory" implementation.
///
/// NOTE: the manager only needs lookups, so any shared keyed storage
/// can stand in for the in memory one.
pub mod store;

/// Transfers, withdrawals and balance queries over an account store.
/// Validates every precondition before touching any balance.
pub mod manager;

/// Parses batch rows into commands that later are executed by [`manager`].
pub mod command;

/// Ideally, this module should exists on its own crate, as a way to
/// bootstrap core logic. However, I want to use it for integration test
/// so I put it here.
pub mod bin_utils;
