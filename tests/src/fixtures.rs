//! # Shared Fixtures
//!
//! A real init data string issued by Telegram's production environment, plus
//! helpers for building services on frozen clocks.

use initdata_verification::domain::test_helpers::test_anchors;
use initdata_verification::{FixedClock, InitDataValidationService};

/// Init data issued by Telegram in production for bot `7342037359`.
///
/// Carries both a third-party `signature` and a bot-token `hash`.
pub const REFERENCE_INIT_DATA: &str = "user=%7B%22id%22%3A279058397%2C%22first_name%22%3A%22Vladislav%20%2B%20-%20%3F%20%5C%2F%22%2C%22last_name%22%3A%22Kibenko%22%2C%22username%22%3A%22vdkfrost%22%2C%22language_code%22%3A%22ru%22%2C%22is_premium%22%3Atrue%2C%22allows_write_to_pm%22%3Atrue%2C%22photo_url%22%3A%22https%3A%5C%2F%5C%2Ft.me%5C%2Fi%5C%2Fuserpic%5C%2F320%5C%2F4FPEE4tmP3ATHa57u6MqTDih13LTOiMoKoLDRG4PnSA.svg%22%7D&chat_instance=8134722200314281151&chat_type=private&auth_date=1733584787&signature=zL-ucjNyREiHDE8aihFwpfR9aggP2xiAo3NSpfe-p7IbCisNlDKlo7Kb6G4D0Ao2mBrSgEk4maLSdv6MLIlADQ&hash=2174df5b000556d044f3f020384e879c8efcab55ddea2ced4eb752e93e7080d6";

/// Bot the reference payload was issued for.
pub const REFERENCE_BOT_ID: u64 = 7342037359;

/// `auth_date` of the reference payload.
pub const REFERENCE_AUTH_DATE: u64 = 1733584787;

/// Fixed "now" for locally signed payloads.
pub const NOW: u64 = 1_750_000_000;

/// Service with Telegram's real keys and a frozen clock.
pub fn telegram_service(now: u64) -> InitDataValidationService<FixedClock> {
    InitDataValidationService::new(FixedClock(now))
}

/// Service trusting the local test issuer keys.
pub fn local_service(now: u64) -> InitDataValidationService<FixedClock> {
    InitDataValidationService::new(FixedClock(now)).with_anchors(test_anchors())
}
