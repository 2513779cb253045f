pub trait Asset: Clone {
    fn name(&self) -> &str;
    fn url(&self) -> &str;
}

pub trait Release {
    type Asset: Asset;

    fn tag(&self) -> &str;
    fn is_prerelease(&self) -> bool;
    fn assets(&self) -> &[Self::Asset];
}
