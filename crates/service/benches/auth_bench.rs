use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use models::user::Role;
use service::auth::domain::LoginInput;
use service::auth::repository::mock::MockAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo.clone(), AuthConfig::new("secret"));
    let user = repo.add_user("bench", Role::Citizen);

    // pre-set the password outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(svc.set_password(user.id, "Benchmark1")).unwrap();

    c.bench_function("auth_token_obtain", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(LoginInput { username: "bench".into(), password: "Benchmark1".into() })).unwrap();
        });
    });

    let pair = svc.issue_pair(&user).unwrap();
    c.bench_function("auth_authenticate_bearer", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.authenticate(&pair.access)).unwrap();
        });
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
