//! Numeric and financial intrinsics. All results are Double.

use super::{IntrinsicRegistry, int_arg, num_arg};
use crate::error::{EvalError, Result};
use crate::value::Value;
use chrono::{Datelike, Local, NaiveDate};

pub(super) fn register(reg: &mut IntrinsicRegistry) -> Result<()> {
    reg.register("Abs", "N", |args| Ok(Value::Double(num_arg(args, 0)?.abs())))?;
    reg.register("Pow", "N,N", |args| {
        Ok(Value::Double(num_arg(args, 0)?.powf(num_arg(args, 1)?)))
    })?;
    reg.register("Apy", "N,N", builtin_apy)?;
    reg.register("Pv", "N,N,I1", builtin_pv)?;
    reg.register("Pva", "N,N,I1", builtin_pva)?;
    reg.register("Dpr", "N,I0", builtin_dpr)?;
    Ok(())
}

/// Annual percentage yield of nominal rate `r` (percent) compounded `p` times a year
fn builtin_apy(args: &[Value]) -> Result<Value> {
    let (rate, periods) = (num_arg(args, 0)?, num_arg(args, 1)?);
    Ok(Value::Double(100.0 * ((1.0 + (rate / 100.0) / periods).powf(periods) - 1.0)))
}

/// Present value of `n` received after `p` periods at `r` percent per period
fn builtin_pv(args: &[Value]) -> Result<Value> {
    let (amount, rate, periods) = (num_arg(args, 0)?, num_arg(args, 1)?, int_arg(args, 2)?);
    Ok(Value::Double(amount / growth(rate).powf(periods as f64)))
}

/// Present value of an annuity paying `n` for `p` periods at `r` percent
fn builtin_pva(args: &[Value]) -> Result<Value> {
    let (amount, rate, periods) = (num_arg(args, 0)?, num_arg(args, 1)?, int_arg(args, 2)?);
    let discount = 1.0 - growth(rate).powf(-(periods as f64));
    Ok(Value::Double(amount * (discount / (rate / 100.0))))
}

/// Daily periodic rate for year `y` (0 = current year)
fn builtin_dpr(args: &[Value]) -> Result<Value> {
    let (rate, year) = (num_arg(args, 0)?, int_arg(args, 1)?);
    let year = if year == 0 { Local::now().year() } else { to_year(year)? };
    let days = days_in_year(year).ok_or_else(|| EvalError::intrinsic("Dpr", format!("year {year} is out of range")))?;
    Ok(Value::Double(rate / (f64::from(days) * 100.0)))
}

fn growth(rate: f64) -> f64 {
    1.0 + rate / 100.0
}

fn to_year(year: i64) -> Result<i32> {
    i32::try_from(year).map_err(|_| EvalError::intrinsic("Dpr", format!("year {year} is out of range")))
}

fn days_in_year(year: i32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, 12, 31).map(|last| last.ordinal())
}
