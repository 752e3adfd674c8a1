//! Code catalogs for the REST (v2) API generation.
//!
//! REST error codes are negative integers and also appear as per-recipient
//! outcome codes in the send result list.

use super::{Language, pick};

/// Resolve a REST API error code to descriptive text.
pub fn error_text(code: i64, lang: Language) -> Option<&'static str> {
    let (en, fa) = match code {
        -100 => ("internal server error", "خطای داخلی سرور"),
        -101 => ("invalid credentials", "اطلاعات ورود نامعتبر است"),
        -102 => ("account expired", "حساب کاربری منقضی شده است"),
        -103 => ("source ip address not allowed", "آی‌پی مبدأ مجاز نیست"),
        -104 => ("insufficient credit", "اعتبار کافی نیست"),
        -105 => ("invalid recipient number", "شماره گیرنده نامعتبر است"),
        -106 => ("sender line not owned by this account", "خط ارسال متعلق به این حساب نیست"),
        -107 => ("message text is empty", "متن پیام خالی است"),
        -108 => ("too many recipients in one call", "تعداد گیرندگان بیش از حد مجاز است"),
        -110 => ("message rejected by content filter", "پیام توسط فیلتر محتوا رد شد"),
        _ => return None,
    };
    Some(pick(lang, en, fa))
}

/// Resolve a REST delivery-state code to descriptive text.
pub fn delivery_text(code: i64, lang: Language) -> Option<&'static str> {
    let (en, fa) = match code {
        1 => ("delivered to handset", "رسیده به گوشی"),
        2 => ("not delivered", "نرسیده به گوشی"),
        4 => ("pending", "در انتظار وضعیت"),
        8 => ("handed to operator", "تحویل به اپراتور"),
        16 => ("blocked by operator", "مسدود شده توسط اپراتور"),
        _ => return None,
    };
    Some(pick(lang, en, fa))
}
