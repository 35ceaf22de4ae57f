use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

use crate::config::AwsContext;

const FALLBACK_REGION: &str = "us-east-1";

/// Loads the shared AWS config for one region/profile context. Falls
/// back to the environment's default region provider chain when no
/// region is given.
pub(crate) async fn sdk_config(context: &AwsContext) -> SdkConfig {
    info!(
        region = ?context.region,
        profile = ?context.profile,
        "Loading AWS config"
    );

    let region_provider = RegionProviderChain::first_try(context.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(Region::new(FALLBACK_REGION));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
    if let Some(profile) = &context.profile {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}
