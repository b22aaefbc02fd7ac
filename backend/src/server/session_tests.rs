//! Session settings validation across build modes.

use std::io::Write;

use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

#[fixture]
fn release_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn release_settings(key: &NamedTempFile) -> AppSettings {
    AppSettings {
        session_key_file: Some(key.path().to_path_buf()),
        session_cookie_secure: Some(true),
        session_same_site: Some("Strict".to_owned()),
        session_allow_ephemeral: Some(false),
        ..AppSettings::default()
    }
}

fn expect_error(result: Result<SessionSettings, SessionConfigError>) -> SessionConfigError {
    match result {
        Ok(_) => panic!("expected session settings to be rejected"),
        Err(error) => error,
    }
}

#[rstest]
fn release_accepts_complete_settings(release_key: NamedTempFile) {
    let settings = session_settings(&release_settings(&release_key), BuildMode::Release)
        .expect("valid release settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case::cookie_secure(|s: &mut AppSettings| s.session_cookie_secure = None, COOKIE_SECURE)]
#[case::same_site(|s: &mut AppSettings| s.session_same_site = None, SAME_SITE)]
#[case::allow_ephemeral(|s: &mut AppSettings| s.session_allow_ephemeral = None, ALLOW_EPHEMERAL)]
fn release_requires_every_toggle(
    release_key: NamedTempFile,
    #[case] unset: fn(&mut AppSettings),
    #[case] expected: &str,
) {
    let mut settings = release_settings(&release_key);
    unset(&mut settings);
    let err = expect_error(session_settings(&settings, BuildMode::Release));
    assert!(matches!(err, SessionConfigError::Missing { name } if name == expected));
}

#[rstest]
fn release_rejects_unknown_same_site(release_key: NamedTempFile) {
    let mut settings = release_settings(&release_key);
    settings.session_same_site = Some("sometimes".to_owned());
    let err = expect_error(session_settings(&settings, BuildMode::Release));
    assert!(matches!(err, SessionConfigError::Invalid { name: SAME_SITE, .. }));
}

#[rstest]
fn release_rejects_insecure_same_site_none(release_key: NamedTempFile) {
    let mut settings = release_settings(&release_key);
    settings.session_cookie_secure = Some(false);
    settings.session_same_site = Some("None".to_owned());
    let err = expect_error(session_settings(&settings, BuildMode::Release));
    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_rejects_ephemeral_keys(release_key: NamedTempFile) {
    let mut settings = release_settings(&release_key);
    settings.session_allow_ephemeral = Some(true);
    let err = expect_error(session_settings(&settings, BuildMode::Release));
    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(32);
    let err = expect_error(session_settings(&release_settings(&short), BuildMode::Release));
    assert!(matches!(
        err,
        SessionConfigError::KeyTooShort { length: 32, .. }
    ));
}

#[rstest]
fn release_rejects_missing_key_file(release_key: NamedTempFile) {
    let mut settings = release_settings(&release_key);
    settings.session_key_file = Some(std::env::temp_dir().join("anilink-no-such-key"));
    let err = expect_error(session_settings(&settings, BuildMode::Release));
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn debug_falls_back_to_development_defaults() {
    let settings = AppSettings {
        session_key_file: Some(std::env::temp_dir().join("anilink-no-such-key")),
        ..AppSettings::default()
    };
    let session = session_settings(&settings, BuildMode::Debug).expect("debug defaults");
    assert!(session.cookie_secure);
    assert_eq!(session.same_site, SameSite::Lax);
}

#[rstest]
fn fingerprints_are_stable_hex() {
    let key = Key::derive_from(&[b'a'; SESSION_KEY_MIN_LEN]);
    let fingerprint = key_fingerprint(&key);
    assert_eq!(fingerprint.len(), FINGERPRINT_BYTES * 2);
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(fingerprint, key_fingerprint(&key));
}
