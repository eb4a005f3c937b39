//! Low-precision Sun and Moon ephemerides, good to a few hundredths of a
//! degree for the Sun and a few tenths for the Moon. Positions are geocentric
//! in the equatorial frame of date, which is close enough to TEME for
//! visibility geometry.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geometry::{Vector3, EARTH_RADIUS_KM};

pub const AU_KM: f64 = 149_597_870.7;
pub const SUN_RADIUS_KM: f64 = 696_000.0;
pub const MOON_RADIUS_KM: f64 = 1_737.4;

const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Ecliptic direction and distance of a body, plus its equatorial position.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BodyPosition {
    pub ecliptic_lon_deg: f64,
    pub ecliptic_lat_deg: f64,
    pub distance_km: f64,
    pub position: Vector3,
}

pub fn julian_date(utc: DateTime<Utc>) -> f64 {
    let seconds = utc.timestamp() as f64 + utc.timestamp_subsec_nanos() as f64 * 1e-9;
    UNIX_EPOCH_JD + seconds / 86_400.0
}

fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

fn mean_obliquity_deg(t: f64) -> f64 {
    23.439_291 - 0.013_004_2 * t
}

fn ecliptic_to_equatorial(lon_deg: f64, lat_deg: f64, distance_km: f64, t: f64) -> Vector3 {
    let lambda = lon_deg.to_radians();
    let beta = lat_deg.to_radians();
    let x = distance_km * beta.cos() * lambda.cos();
    let y = distance_km * beta.cos() * lambda.sin();
    let z = distance_km * beta.sin();

    let eps = mean_obliquity_deg(t).to_radians();
    Vector3::new(x, y * eps.cos() - z * eps.sin(), y * eps.sin() + z * eps.cos())
}

pub fn sun_position(utc: DateTime<Utc>) -> BodyPosition {
    let n = julian_date(utc) - J2000_JD;
    let t = n / 36_525.0;

    let mean_lon = normalize_deg(280.460 + 0.985_647_4 * n);
    let g = normalize_deg(357.528 + 0.985_600_3 * n).to_radians();
    let lon = normalize_deg(mean_lon + 1.915 * g.sin() + 0.020 * (2.0 * g).sin());
    let distance_km = (1.000_14 - 0.016_71 * g.cos() - 0.000_14 * (2.0 * g).cos()) * AU_KM;

    BodyPosition {
        ecliptic_lon_deg: lon,
        ecliptic_lat_deg: 0.0,
        distance_km,
        position: ecliptic_to_equatorial(lon, 0.0, distance_km, t),
    }
}

#[derive(Copy, Clone)]
struct LonDistTerm {
    d: i32,
    m: i32,
    mp: i32,
    f: i32,
    l: i32,
    r: i32,
}

#[derive(Copy, Clone)]
struct LatTerm {
    d: i32,
    m: i32,
    mp: i32,
    f: i32,
    b: i32,
}

const fn ld(d: i32, m: i32, mp: i32, f: i32, l: i32, r: i32) -> LonDistTerm {
    LonDistTerm { d, m, mp, f, l, r }
}

const fn lb(d: i32, m: i32, mp: i32, f: i32, b: i32) -> LatTerm {
    LatTerm { d, m, mp, f, b }
}

// Leading terms of Meeus tables 45.A and 45.B.
// l and b in 1e-6 degrees, r in 1e-3 km.
const LON_DIST_TERMS: [LonDistTerm; 12] = [
    ld(0, 0, 1, 0, 6_288_774, -20_905_355),
    ld(2, 0, -1, 0, 1_274_027, -3_699_111),
    ld(2, 0, 0, 0, 658_314, -2_955_968),
    ld(0, 0, 2, 0, 213_618, -569_925),
    ld(0, 1, 0, 0, -185_116, 48_888),
    ld(0, 0, 0, 2, -114_332, -3_149),
    ld(2, 0, -2, 0, 58_793, 246_158),
    ld(2, -1, -1, 0, 57_066, -152_138),
    ld(2, 0, 1, 0, 53_322, -170_733),
    ld(2, -1, 0, 0, 45_758, -204_586),
    ld(0, 1, -1, 0, -40_923, -129_620),
    ld(1, 0, 0, 0, -34_720, 108_743),
];

const LAT_TERMS: [LatTerm; 8] = [
    lb(0, 0, 0, 1, 5_128_122),
    lb(0, 0, 1, 1, 280_602),
    lb(0, 0, 1, -1, 277_693),
    lb(2, 0, 0, -1, 173_237),
    lb(2, 0, -1, 1, 55_413),
    lb(2, 0, -1, -1, 46_271),
    lb(2, 0, 0, 1, 32_573),
    lb(0, 0, 2, 1, 17_198),
];

fn eccentricity_factor(m: i32, e: f64) -> f64 {
    match m.abs() {
        1 => e,
        2 => e * e,
        _ => 1.0,
    }
}

pub fn moon_position(utc: DateTime<Utc>) -> BodyPosition {
    let t = (julian_date(utc) - J2000_JD) / 36_525.0;

    let l_prime = normalize_deg(218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t * t);
    let d = normalize_deg(297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t * t);
    let m = normalize_deg(357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t * t);
    let mp = normalize_deg(134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t * t);
    let f = normalize_deg(93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t * t);
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t * t;

    let argument = |td: i32, tm: i32, tmp: i32, tf: i32| {
        (td as f64 * d + tm as f64 * m + tmp as f64 * mp + tf as f64 * f).to_radians()
    };

    let mut sum_l = 0.0;
    let mut sum_r = 0.0;
    for term in LON_DIST_TERMS {
        let arg = argument(term.d, term.m, term.mp, term.f);
        let factor = eccentricity_factor(term.m, e);
        sum_l += term.l as f64 * factor * arg.sin();
        sum_r += term.r as f64 * factor * arg.cos();
    }

    let mut sum_b = 0.0;
    for term in LAT_TERMS {
        let arg = argument(term.d, term.m, term.mp, term.f);
        sum_b += term.b as f64 * eccentricity_factor(term.m, e) * arg.sin();
    }

    let lon = normalize_deg(l_prime + sum_l / 1_000_000.0);
    let lat = sum_b / 1_000_000.0;
    let distance_km = 385_000.56 + sum_r / 1000.0;

    BodyPosition {
        ecliptic_lon_deg: lon,
        ecliptic_lat_deg: lat,
        distance_km,
        position: ecliptic_to_equatorial(lon, lat, distance_km, t),
    }
}

/// Elongation of the Moon east of the Sun in ecliptic longitude, degrees in
/// [0, 360). 0 is new moon, 180 full.
pub fn moon_phase_deg(utc: DateTime<Utc>) -> f64 {
    normalize_deg(moon_position(utc).ecliptic_lon_deg - sun_position(utc).ecliptic_lon_deg)
}

/// Illuminated fraction for a phase angle in degrees.
pub fn illuminated_fraction(phase_deg: f64) -> f64 {
    (1.0 - phase_deg.to_radians().cos()) / 2.0
}

/// Cylindrical Earth shadow test. `position` and `sun` share one inertial
/// frame; only the direction of `sun` matters.
pub fn is_sunlit(position: Vector3, sun: Vector3) -> bool {
    let Ok(sun_hat) = sun.unit() else {
        return true;
    };
    let along = position.dot(sun_hat);
    if along >= 0.0 {
        return true;
    }
    let perpendicular = position - sun_hat * along;
    perpendicular.norm() > EARTH_RADIUS_KM
}
