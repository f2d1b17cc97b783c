//! Stamps the build date and time into the draco-decoder version string.
//! `DRACO_BUILD_DATE` / `DRACO_BUILD_TIME` in the environment take precedence.

fn stamp(now: time::OffsetDateTime, var: &str, format: &str) -> String {
    if let Ok(value) = std::env::var(var) {
        return value;
    }
    time::format_description::parse(format)
        .ok()
        .and_then(|fmt| now.format(&fmt).ok())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let now = time::OffsetDateTime::now_utc();
    for (var, format) in [
        ("DRACO_BUILD_DATE", "[year]-[month]-[day]"),
        ("DRACO_BUILD_TIME", "[hour]:[minute]:[second] UTC"),
    ] {
        println!("cargo:rerun-if-env-changed={var}");
        println!("cargo:rustc-env={var}={}", stamp(now, var, format));
    }
}
