use num_bigint::BigInt;
use tracing::info;
use tracing_subscriber::fmt;

use bilinear::arith::{Group, PairingType};
use bilinear::factory::{BilinearGroupFactory, BilinearGroupRequirement};
use bilinear::repr::Representable;
use bilinear::FactoryConfig;

const SECURITY: u32 = 80;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_span_events(fmt::format::FmtSpan::ENTER | fmt::format::FmtSpan::CLOSE)
        .with_target(false)
        .with_ansi(false)
        .init();

    // Symmetric prime-order group with hashing into G1, operations deferred
    let config = FactoryConfig::new(
        SECURITY,
        BilinearGroupRequirement::with_hashing(PairingType::Type1, true, false, false),
        false,
        true,
    )?;
    let factory = BilinearGroupFactory::from_config(&config)?;
    let group = factory.create_bilinear_group()?;
    info!(order = ?group.g1().size(), "created bilinear group");

    let (g1, gt) = (group.g1(), group.gt());
    let e = group.bilinear_map();
    let h = group.hash_into_g1()?.hash_into(b"alice@example.com")?;
    let g = g1.generator()?;
    let (x, y) = (BigInt::from(1234), BigInt::from(5678));

    let lhs = e.apply(&g1.pow(&h, &x)?, &g1.pow(&g, &y)?)?;
    let rhs = gt.pow(&e.apply(&h, &g)?, &(&x * &y))?;
    info!(bilinear = lhs == rhs, "checked e(h^x, g^y) = e(h, g)^(xy)");

    let stored = serde_json::to_string(&group.to_repr())?;
    info!(bytes = stored.len(), "serialized group description");

    // Composite-order debug group for quick tests
    let mut factory = BilinearGroupFactory::new(SECURITY);
    factory
        .set_requirements(BilinearGroupRequirement::with_prime_factors(PairingType::Type3, 3))
        .set_debug_mode(true);
    let debug_group = factory.create_bilinear_group()?;
    info!(order = ?debug_group.gt().size(), "created debug group");

    Ok(())
}
