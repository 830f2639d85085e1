//! Image CAPTCHA challenges, held client-side in an encrypted, signed cookie.

use std::io::Cursor;

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{imageops, DynamicImage, ImageError, ImageOutputFormat, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};
use rocket::{
    http::{Cookie, SameSite, Status},
    outcome::{try_outcome, IntoOutcome},
    request::{self, FromRequest},
    Request, State,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Config;

pub const CAPTCHA_COOKIE: &str = "captcha";

/// Number of characters in a challenge.
pub const LENGTH: usize = 5;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const WIDTH: u32 = 300;
const HEIGHT: u32 = 100;
const TILE_SIZE: u32 = 80;
const GLYPH_SCALE: u32 = 6;
const FIRST_GLYPH_X: i64 = 20;
const GLYPH_ADVANCE: i64 = 50;
const GLYPH_Y: i64 = 10;
const MAX_ROTATION_DEGREES: f32 = 20.0;
const BLUR_SIGMA: f32 = 0.6;

/// A CAPTCHA challenge: the text the user has to read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Captcha {
    #[serde(rename = "txt")]
    pub text: String,
}

impl Captcha {
    /// Create a challenge of random uppercase alphanumerics.
    pub fn new() -> Self {
        let index_dist = Uniform::from(0..ALPHABET.len());
        let mut rng = rand::thread_rng();
        let text = (0..LENGTH)
            .map(|_| ALPHABET[index_dist.sample(&mut rng)] as char)
            .collect();
        Self { text }
    }

    /// Case-insensitive exact comparison against what the user typed.
    pub fn matches(&self, submitted: &str) -> bool {
        submitted.eq_ignore_ascii_case(&self.text)
    }

    /// Render the challenge as a PNG.
    pub fn render_png(&self) -> Result<Vec<u8>, ImageError> {
        let image = self.render(&mut rand::thread_rng());
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
        Ok(png)
    }

    /// Draw the text over a vertical gradient, each glyph in its own random
    /// colour and rotation, then blur the whole thing.
    fn render<R: Rng>(&self, rng: &mut R) -> RgbaImage {
        let mut canvas = RgbaImage::from_fn(WIDTH, HEIGHT, |_, y| {
            let y = y as f32;
            Rgba([
                (255.0 - y * 0.8) as u8,
                (200.0 - y * 1.2) as u8,
                (255.0 - y * 0.5) as u8,
                255,
            ])
        });

        let mut x = FIRST_GLYPH_X;
        for c in self.text.chars() {
            let colour = Rgba([
                rng.gen_range(0..=150),
                rng.gen_range(0..=150),
                rng.gen_range(0..=150),
                255,
            ]);
            let tile = glyph_tile(c, colour);
            let angle = rng
                .gen_range(-MAX_ROTATION_DEGREES..=MAX_ROTATION_DEGREES)
                .to_radians();
            let rotated = rotate_about_center(&tile, angle, Interpolation::Bilinear, Rgba([0; 4]));
            imageops::overlay(&mut canvas, &rotated, x, GLYPH_Y);
            x += GLYPH_ADVANCE;
        }

        imageops::blur(&canvas, BLUR_SIGMA)
    }

    // Challenge serialization never fails.
    #[allow(clippy::missing_panics_doc)]
    /// Convert into a session cookie. The challenge stays valid until a new
    /// one replaces it.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let claims = Claims { captcha: self };
        Cookie::build(
            CAPTCHA_COOKIE,
            jsonwebtoken::encode(
                &Header::default(),
                &claims,
                &EncodingKey::from_secret(config.jwt_secret()),
            )
            .expect("JWT encoding is infallible with default settings"),
        )
        .http_only(true)
        .same_site(SameSite::Strict)
        .finish()
    }

    /// Deserialize a challenge from a cookie, rejecting tampered ones.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &validation(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.captcha)
    }
}

impl Default for Captcha {
    fn default() -> Self {
        Self::new()
    }
}

/// A transparent square tile with one glyph drawn in the middle.
/// Characters missing from the font leave the tile empty.
fn glyph_tile(c: char, colour: Rgba<u8>) -> RgbaImage {
    let mut tile = RgbaImage::new(TILE_SIZE, TILE_SIZE);
    let Some(rows) = BASIC_FONTS.get(c) else {
        return tile;
    };
    let origin = (TILE_SIZE - 8 * GLYPH_SCALE) / 2;
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..8 {
            if *bits & (1u8 << col) == 0 {
                continue;
            }
            let left = origin + col * GLYPH_SCALE;
            let top = origin + row as u32 * GLYPH_SCALE;
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    tile.put_pixel(left + dx, top + dy, colour);
                }
            }
        }
    }
    tile
}

/// Cookie claims: the challenge alone, without an `exp`.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    captcha: Captcha,
}

/// Signature checks only; challenges never expire.
fn validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    validation
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Captcha {
    type Error = CaptchaError;

    /// Get the challenge from the private cookie.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = req.guard::<&State<Config>>().await.unwrap(); // Valid as `Config` is always managed

        let cookie = try_outcome!(req
            .cookies()
            .get_private(CAPTCHA_COOKIE)
            .into_outcome((Status::BadRequest, CaptchaError::Missing)));

        let captcha = try_outcome!(Captcha::from_cookie(&cookie, config)
            .map_err(CaptchaError::Jwt)
            .into_outcome(Status::BadRequest));

        request::Outcome::Success(captcha)
    }
}

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("Missing `captcha` cookie")]
    Missing,
    #[error(transparent)]
    Jwt(#[from] JwtError),
}
