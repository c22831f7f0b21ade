pub mod behavioral;
pub mod capabilities;
pub mod context;
pub mod fingerprint;
pub mod provider;
pub mod stealth;
