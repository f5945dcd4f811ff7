//! Parameter names shared by the schema builder, the halo models and the
//! result tables.

pub const C200: &str = "c200";
pub const V200: &str = "v200";
pub const V200_FACTOR: &str = "v200_factor";
pub const ALPHA: &str = "alpha";
pub const MLD: &str = "MLd";
pub const MLB: &str = "MLb";
pub const LUMINOSITY: &str = "luminosity";
pub const MSTAR: &str = "mstar";
pub const MGAS: &str = "mgas";
pub const M22: &str = "m22";
pub const MSOL: &str = "Msol";

pub const C200_2: &str = "c200_2";
pub const V200_2: &str = "v200_2";
pub const ALPHA_2: &str = "alpha_2";
pub const M22_2: &str = "m22_2";
pub const MSOL_2: &str = "Msol_2";
