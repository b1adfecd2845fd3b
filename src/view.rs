use std::fmt;

use itertools::Itertools;

use crate::{avatar::DataUrl, store::Profile};

pub const DEFAULT_AVATAR: &str = "/avatar.png";

const UPLOAD_HINT: &str = "Click the camera icon to update your photo";
const UPLOADING_HINT: &str = "Uploading...";

/// Where the avatar should be loaded from, falling back to the bundled
/// default when the stored picture is missing or unusable.
pub fn avatar_src(profile_pic: Option<&str>) -> &str {
    match profile_pic.map(str::trim) {
        Some(pic) if loadable(pic) => pic,
        _ => DEFAULT_AVATAR,
    }
}

fn loadable(src: &str) -> bool {
    if src.is_empty() {
        return false;
    }
    if src.starts_with("data:") {
        return src.parse::<DataUrl>().is_ok_and(|url| url.is_image());
    }
    true
}

/// Text rendering of the profile screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView<'a> {
    profile: &'a Profile,
    uploading: bool,
}

impl<'a> ProfileView<'a> {
    pub fn new(profile: &'a Profile, uploading: bool) -> ProfileView<'a> {
        ProfileView { profile, uploading }
    }

    pub fn avatar_src(&self) -> &'a str {
        let profile: &'a Profile = self.profile;
        avatar_src(profile.profile_pic.as_deref())
    }

    pub fn member_since(&self) -> String {
        self.profile.created_at.date_naive().to_string()
    }

    fn hint(&self) -> &'static str {
        if self.uploading {
            UPLOADING_HINT
        } else {
            UPLOAD_HINT
        }
    }

    fn lines(&self) -> Vec<String> {
        let avatar = match self.avatar_src() {
            src if src.starts_with("data:") => format!("{} bytes inline", src.len()),
            src => src.to_string(),
        };
        vec![
            "Profile".to_string(),
            "Your profile information".to_string(),
            String::new(),
            format!("Avatar          {avatar}"),
            self.hint().to_string(),
            String::new(),
            format!("Full Name       {}", self.profile.full_name),
            format!("Email Address   {}", self.profile.email),
            String::new(),
            "Account Information".to_string(),
            format!("Member Since    {}", self.member_since()),
            "Account Status  Active".to_string(),
        ]
    }
}

impl fmt::Display for ProfileView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().iter().join("\n"))
    }
}
