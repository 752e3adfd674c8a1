//! Code catalogs for the classic (v1) API generation.
//!
//! Classic error codes are positive integers. Per-recipient send entries
//! reuse this table after negation: a `-6` entry in the send result array is
//! error `6`.

use super::{Language, pick};

/// Resolve a classic API error code to descriptive text.
pub fn error_text(code: i64, lang: Language) -> Option<&'static str> {
    let (en, fa) = match code {
        1 => ("invalid username or password", "نام کاربری یا رمز عبور نامعتبر است"),
        2 => ("source ip address not allowed", "آی‌پی مبدأ مجاز نیست"),
        3 => ("sender line not owned by this account", "خط ارسال متعلق به این حساب نیست"),
        4 => ("account suspended", "حساب کاربری مسدود شده است"),
        5 => ("message text is empty", "متن پیام خالی است"),
        6 => ("insufficient credit", "اعتبار کافی نیست"),
        7 => ("daily quota exceeded", "سقف ارسال روزانه پر شده است"),
        8 => ("too many recipients in one call", "تعداد گیرندگان بیش از حد مجاز است"),
        11 => ("invalid recipient number", "شماره گیرنده نامعتبر است"),
        12 => ("recipient is blacklisted", "شماره گیرنده در لیست سیاه است"),
        20 => ("message rejected by content filter", "پیام توسط فیلتر محتوا رد شد"),
        _ => return None,
    };
    Some(pick(lang, en, fa))
}

/// Resolve a classic delivery-state code to descriptive text.
pub fn delivery_text(code: i64, lang: Language) -> Option<&'static str> {
    let (en, fa) = match code {
        0 => ("queued", "در صف ارسال"),
        1 => ("delivered to handset", "رسیده به گوشی"),
        2 => ("not delivered", "نرسیده به گوشی"),
        3 => ("expired", "منقضی شده"),
        4 => ("no delivery route", "مسیر ارسال موجود نیست"),
        5 => ("rejected by operator", "رد شده توسط اپراتور"),
        _ => return None,
    };
    Some(pick(lang, en, fa))
}
