#[allow(clippy::too_many_arguments)]
pub mod token {
    alloy::sol!(
        /// ERC-404 token exempting whitelisted addresses from its mint/burn
        /// on transfer mechanics.
        #[derive(Debug)]
        #[sol(rpc)]
        interface My404 {
            function setWhitelist(address target, bool state) external;
            function whitelist(address target) external view returns (bool);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod uniswap_v3 {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface INonfungiblePositionManager {
            function createAndInitializePoolIfNecessary(
                address token0,
                address token1,
                uint24 fee,
                uint160 sqrtPriceX96
            ) external payable returns (address pool);
        }
    );

    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface IUniswapV3Factory {
            function getPool(address tokenA, address tokenB, uint24 fee)
                external
                view
                returns (address pool);
        }
    );
}
