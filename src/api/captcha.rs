use rocket::{
    http::{CookieJar, Header},
    Route, State,
};

use crate::{captcha::Captcha, error::Result, Config};

pub fn routes() -> Vec<Route> {
    routes![captcha]
}

/// A freshly rendered challenge that must never be cached.
#[derive(Responder)]
#[response(content_type = "image/png")]
pub struct CaptchaImage {
    png: Vec<u8>,
    cache_control: Header<'static>,
    pragma: Header<'static>,
    expires: Header<'static>,
}

impl CaptchaImage {
    fn new(png: Vec<u8>) -> Self {
        Self {
            png,
            cache_control: Header::new(
                "Cache-Control",
                "no-store, no-cache, must-revalidate, max-age=0",
            ),
            pragma: Header::new("Pragma", "no-cache"),
            expires: Header::new("Expires", "0"),
        }
    }
}

/// Issue a new challenge, replacing any previous one.
#[get("/captcha")]
pub fn captcha(cookies: &CookieJar<'_>, config: &State<Config>) -> Result<CaptchaImage> {
    let captcha = Captcha::new();
    let png = captcha.render_png()?;
    cookies.add_private(captcha.into_cookie(config));
    Ok(CaptchaImage::new(png))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };

    use crate::captcha::CAPTCHA_COOKIE;

    use super::*;

    #[backend_test]
    async fn serves_png_and_sets_cookie(client: Client) {
        let response = client.get(uri!(captcha)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(Some(ContentType::PNG), response.content_type());
        assert_eq!(
            Some("no-store, no-cache, must-revalidate, max-age=0"),
            response.headers().get_one("Cache-Control")
        );
        assert_eq!(Some("no-cache"), response.headers().get_one("Pragma"));
        assert_eq!(Some("0"), response.headers().get_one("Expires"));

        let png = response.into_bytes().await.unwrap();
        assert!(image::load_from_memory(&png).is_ok());

        let cookie = client.cookies().get_private(CAPTCHA_COOKIE).unwrap();
        let challenge = Captcha::from_cookie(&cookie, client.rocket().state().unwrap()).unwrap();
        assert_eq!(challenge.text.len(), crate::captcha::LENGTH);
    }

    #[backend_test]
    async fn new_challenge_replaces_old(client: Client) {
        client.get(uri!(captcha)).dispatch().await;
        let first = client.cookies().get_private(CAPTCHA_COOKIE).unwrap();

        client.get(uri!(captcha)).dispatch().await;
        let second = client.cookies().get_private(CAPTCHA_COOKIE).unwrap();

        assert_ne!(first.value(), second.value());
    }
}
