use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequestDto {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequestDto {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponseDto {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{LoginResponseDto, RegisterRequestDto};

    #[test]
    pub fn test_register_omits_missing_email() {
        let dto = RegisterRequestDto {
            username: "ada".to_owned(),
            password: "secret".to_owned(),
            email: None,
        };
        assert_eq!(
            r#"{"username":"ada","password":"secret"}"#,
            serde_json::to_string(&dto).unwrap()
        );
    }

    #[test]
    pub fn test_login_accepts_access_token() {
        let dto: LoginResponseDto =
            serde_json::from_str(r#"{"access_token":"abc","username":"ada"}"#).unwrap();
        assert_eq!("abc", dto.token);
        let dto: LoginResponseDto = serde_json::from_str(r#"{"token":"xyz"}"#).unwrap();
        assert_eq!("xyz", dto.token);
        assert_eq!(None, dto.username);
    }
}
