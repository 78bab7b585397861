//! Checks on the container build recipe.

const DOCKERFILE: &str = include_str!("../../../Dockerfile");

fn instructions() -> impl Iterator<Item = &'static str> {
    DOCKERFILE
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[test]
fn test_build_uses_committed_lockfile() {
    assert!(
        instructions().any(|line| line == "COPY Cargo.toml Cargo.lock ./"),
        "Cargo.lock must be copied without a glob"
    );
    let build = instructions()
        .find(|line| line.starts_with("RUN cargo build"))
        .expect("builder stage runs cargo build");
    assert!(build.contains("--locked"), "build must not re-resolve: {build}");
    assert!(build.contains("--release"));
}

#[test]
fn test_runtime_contract() {
    let lines: Vec<&str> = instructions().collect();
    assert!(lines.contains(&"WORKDIR /app"));
    assert!(lines.contains(&"COPY .env .env"));
    assert!(lines.contains(&r#"ENTRYPOINT ["newsdigest"]"#));
    assert!(lines.contains(&r#"CMD ["run"]"#));
}
